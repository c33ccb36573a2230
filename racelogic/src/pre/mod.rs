pub mod check_race_pars;
pub mod race_opts;
pub mod read_race_pars;
