use classroom_hub::error::app_error::AppError;
use classroom_hub::{Config, build_rocket};
use rocket::{Build, Rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:?}", AppError::from(e));
            std::process::exit(1);
        }
    };

    build_rocket(config)
}
