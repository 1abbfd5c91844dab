pub mod merchant;
pub mod order;
pub mod payment;
