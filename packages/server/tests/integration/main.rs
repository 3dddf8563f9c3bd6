
mod app;
mod handicraft;
