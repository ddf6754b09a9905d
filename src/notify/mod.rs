pub mod desktop;
pub mod email;
pub mod template;
