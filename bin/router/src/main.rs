use route_gate::router_entrypoint;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let script_path = std::env::args().nth(1);

    match router_entrypoint(script_path).await {
        Ok(_) => Ok(()),
        Err(err) => {
            eprintln!("Failed to start route-gate:\n{}", err);

            Err(err.into())
        }
    }
}
