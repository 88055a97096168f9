mod app;
mod logging;

#[tokio::main]
async fn main() {
    let exit = app::run_app().await;
    std::process::exit(exit);
}
