pub mod ask_gita_request;
pub mod ask_gita_route;
