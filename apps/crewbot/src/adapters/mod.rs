//! SeaORM adapters. Functions here return raw `DbErr`; repos map them.

pub mod games_sea;
