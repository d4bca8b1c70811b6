//! Общие типы контрактов: агрегаты домена возвратов, DTO и перечисления.
//!
//! Крейт не содержит логики хранения — только структуры данных,
//! разделяемые движком и его потребителями.

pub mod dashboards;
pub mod domain;
pub mod enums;
