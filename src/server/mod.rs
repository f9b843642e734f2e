//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Blog;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Server options from the command line
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub ip: String,
    pub port: u16,
    /// Regenerate every `revalidate` seconds and reload browsers
    pub revalidate: bool,
    pub open: bool,
    /// Offline source used for every regeneration
    pub fixture: Option<PathBuf>,
}

/// Start the development server
pub async fn start(blog: &Blog, options: ServerOptions) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: blog.public_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: options.revalidate,
    });

    // Create router with live reload endpoint
    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address - handle "localhost" specially
    let ip = options.ip.as_str();
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, options.port).parse()?;

    let url = format!("http://{}:{}", ip, options.port);
    println!("Server running at {}", url);
    if options.revalidate {
        println!(
            "Live reload enabled. Regenerating every {}s...",
            blog.config.revalidate.max(1)
        );
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if options.open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if options.revalidate {
        let blog = blog.clone();
        let fixture = options.fixture.clone();
        tokio::spawn(async move {
            revalidate_and_reload(blog, fixture, reload_tx).await;
        });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Regenerate the site on a fixed interval and notify browsers on success.
///
/// A failed run keeps the previous output in place.
async fn revalidate_and_reload(
    blog: Blog,
    fixture: Option<PathBuf>,
    reload_tx: broadcast::Sender<()>,
) {
    let period = Duration::from_secs(blog.config.revalidate.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; the site was just generated
    interval.tick().await;

    loop {
        interval.tick().await;

        tracing::info!("Revalidating...");
        match blog.generate(fixture.as_deref()).await {
            Ok(report) => {
                tracing::info!(
                    "Regenerated {} posts ({} skipped)",
                    report.posts_written,
                    report.posts_skipped
                );
                // Nobody listening is fine
                let _ = reload_tx.send(());
            }
            Err(e) => {
                tracing::error!("Regeneration failed: {:#}", e);
            }
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Fallback handler that serves files and injects live reload script
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path();

    // Determine the file path
    let file_path = if path == "/" {
        state.public_dir.join("index.html")
    } else {
        let clean_path = path.trim_start_matches('/');
        let candidate = state.public_dir.join(clean_path);

        // If it's a directory, look for index.html
        if candidate.is_dir() {
            candidate.join("index.html")
        } else if candidate.exists() {
            candidate
        } else {
            // Try adding .html extension
            let with_html = state.public_dir.join(format!("{}.html", clean_path));
            if with_html.exists() {
                with_html
            } else {
                candidate
            }
        }
    };

    // Check if it's an HTML file that needs live reload injection
    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false)
        || file_path.ends_with("index.html");

    if is_html && state.live_reload {
        // Read and inject live reload script
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => {
                let injected = inject_live_reload(&content);
                Html(injected).into_response()
            }
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        // Serve static file using tower-http
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body><p>post</p></body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));
        assert_eq!(html.matches("</body>").count(), 1);

        let fragment = inject_live_reload("<p>no body</p>");
        assert!(fragment.starts_with("<p>no body</p>"));
        assert!(fragment.contains("/__livereload"));
    }
}
