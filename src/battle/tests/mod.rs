pub mod common;

mod test_fainting;
mod test_switch;
mod test_weather;
