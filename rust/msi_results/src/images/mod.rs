mod accumulator;
pub mod posting;
pub mod reconstruct;

pub use accumulator::PostedIon;
pub use posting::{
    post_images,
    post_ion_images,
    PostingSummary,
};
pub use reconstruct::{
    reconstruct,
    ReconstructedIon,
};
