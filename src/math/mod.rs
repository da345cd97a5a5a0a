pub mod interpolate;
pub mod physics;

#[cfg(test)]
mod tests;
