pub mod superjob_vacancy;
pub mod vacancy;
