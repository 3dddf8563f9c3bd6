pub mod handicraft;
pub mod handicraft_tag;
pub mod kegiatan;
pub mod tag;
