// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod address;
pub mod client;
pub mod contact;
pub mod fiscal_year;
pub mod member;
pub mod organization;
pub mod product;
pub mod repositories;
pub mod shared;
pub mod supplier;
pub mod user;
