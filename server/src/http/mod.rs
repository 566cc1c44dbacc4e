pub mod bounty;
pub mod donation;
pub mod health;
pub mod nft;
pub mod response;
pub mod routes;
pub mod twitch;
