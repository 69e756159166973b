pub mod health;
pub mod oracle;
