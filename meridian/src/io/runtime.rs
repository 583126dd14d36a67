//! Managed thread for the Tokio runtime driving the tile fetches.

pub(crate) struct Runtime {
    join_handle: Option<std::thread::JoinHandle<()>>,
    quit_tx: tokio::sync::mpsc::UnboundedSender<()>,
}

impl Runtime {
    /// Spawn a thread with a current-thread Tokio runtime and run `f` on it until either the
    /// future finishes or this handle is dropped.
    pub fn new<F>(f: F) -> Self
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        let (quit_tx, mut quit_rx) = tokio::sync::mpsc::unbounded_channel();

        let join_handle = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    log::error!("Could not create the Tokio runtime, tiles will not load: {e}");
                    return;
                }
            };

            runtime.spawn(f);
            runtime.block_on(quit_rx.recv());
        });

        Self {
            join_handle: Some(join_handle),
            quit_tx,
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Tokio thread might be dead already, nothing to do in this case.
        let _ = self.quit_tx.send(());

        if let Some(join_handle) = self.join_handle.take() {
            log::debug!("Waiting for the Tokio thread to exit.");
            let _ = join_handle.join();
        }

        log::debug!("Tokio thread is down.");
    }
}
