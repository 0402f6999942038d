pub mod ads;
pub mod categories;
pub mod profiles;
pub mod reviews;
pub mod users;
