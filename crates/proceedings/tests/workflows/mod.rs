use super::*;

mod modes;
mod resume;
mod served;
