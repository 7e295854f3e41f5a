#[tokio::main]
async fn main() {
    afrolumi::start_server().await;
}
