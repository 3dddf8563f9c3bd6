pub mod handicraft;
pub mod kegiatan;
pub mod shared;
