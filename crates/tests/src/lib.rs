pub mod fixtures;

#[cfg(test)]
mod binding_tests;
#[cfg(test)]
mod drive_tests;
#[cfg(test)]
mod recent_tests;
