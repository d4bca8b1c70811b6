//! Движок жизненного цикла возвратов (RMA).
//!
//! Всё состояние живёт в одной базе SQLite. Переходы статусов выполняются
//! атомарно: смена статуса, поля этапа, журнал активности и складские
//! эффекты фиксируются одной транзакцией.

pub mod dashboards;
pub mod domain;
pub mod shared;
