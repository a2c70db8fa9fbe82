use crate::{config, error, info, server, warning};

pub async fn serve(address: Option<String>) {
    for key in config::missing_required() {
        warning!("{} is not set; requests that need it will fail", key);
    }

    let state = match server::AppState::from_env() {
        Ok(state) => state,
        Err(e) => error!("Cannot set up clients: {}", e),
    };

    let addr = address.unwrap_or_else(config::server_addr);
    info!("Vibe Maker listening on http://{}", addr);

    if let Err(e) = server::start_api_server(state, &addr).await {
        error!("{}", e);
    }
}
