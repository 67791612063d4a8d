pub mod gita;
pub mod health;
