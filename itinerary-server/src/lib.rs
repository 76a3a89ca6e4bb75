//! Multi-destination flight itinerary planner server.
//!
//! A web application that answers: "starting from this airport, in what
//! order should I fly to visit all of these airports?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod network;
pub mod planner;
pub mod web;
