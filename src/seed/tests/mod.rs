mod test_constants;
mod test_key_schedule;
mod test_round;
mod test_step;
