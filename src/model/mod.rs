pub mod classification;
pub mod config;
pub mod constants;
pub mod elo;
pub mod export;
pub mod glicko2;
pub mod lineage;
pub mod normalization;
pub mod pairing;
pub mod rating_store;
pub mod root_finding;
pub mod series_model;
pub mod structures;
