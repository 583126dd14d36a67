use demo::MapApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    eframe::run_native(
        "Meridian",
        Default::default(),
        Box::new(|cc| Ok(Box::new(MapApp::new(cc.egui_ctx.clone())))),
    )
}
