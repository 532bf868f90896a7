#![allow(dead_code)]

pub mod routes;
