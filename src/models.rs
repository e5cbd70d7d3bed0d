// src/models.rs

pub mod auth;
pub mod company;
pub mod group;
pub mod messaging;
pub mod news;
pub mod notification;
