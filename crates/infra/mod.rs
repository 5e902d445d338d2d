pub mod db;
pub mod services;
