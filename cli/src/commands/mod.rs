pub mod evaluate;
pub mod health;
pub mod keygen;
pub mod report;
