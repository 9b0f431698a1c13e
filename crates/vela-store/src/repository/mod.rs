//! # Repository Layer
//!
//! One repository struct per hot entity of the POS flow. The remaining
//! admin-console entities (categories, customers, suppliers, expenses,
//! purchase orders, notifications, settings, users, tenants) are served
//! entirely by the bulk cache writer and the tenant state loader - their
//! CRUD screens talk to the gateway, not to this store.

pub mod order;
pub mod pending;
pub mod product;
pub mod stock_log;
