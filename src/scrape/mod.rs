pub mod html;
pub mod rates;
