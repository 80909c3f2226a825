//! Ctrl-C handling.

use chorus_engine::ShutdownHandle;

/// Raises `handle` on the first Ctrl-C.
///
/// Jobs already running finish and move their output into place; jobs not
/// yet started are reported as cancelled.
pub fn raise_on_ctrl_c(handle: ShutdownHandle) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("chorus-ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if let Ok(()) = tokio::signal::ctrl_c().await {
                    eprintln!("\nShutting down after running jobs finish...");
                    handle.shutdown();
                }
            })
        })?;
    Ok(())
}
