//! A parameter server: one authoritative copy of a model's parameters, read and
//! updated over HTTP by any amount of workers.

pub mod client;
pub mod initialization;
pub mod model;
pub mod optimization;
pub mod service;
pub mod storage;
pub mod synchronization;
