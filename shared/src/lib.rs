pub mod models {
    pub mod zone;
}
