use excmd::completion::FsGlob;
use excmd::errors::CommandError;
use excmd::host::{FileService, Glob};
use excmd::memory::MemoryHost;
use excmd::session::ExSession;
use excmd_term::{TerminalKeys, TerminalScreen};

fn main() -> Result<(), std::io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut host = create_host()?;
    let mut session = ExSession::default();
    let mut keys = TerminalKeys::default();
    let mut screen = TerminalScreen::new()?;
    let mut shown = 0;

    if let Some(path) = std::env::args().nth(1) {
        if let Err(e) = host.load_file(&path) {
            println!("{}", e);
        }

        session.store.files.set_current(Some(path));
    }

    println!("Reading Ex commands; ':q' quits the loop, ':%p' prints the buffer.");

    loop {
        screen.enable()?;
        let res = session.run_command_line(':', &mut keys, &mut host, &mut screen);
        screen.disable()?;

        match res {
            Ok(_) => {},
            Err(CommandError::Environment(e)) => {
                println!("{}", e);

                return Ok(());
            },
            Err(e) => {
                // Already shown on the command line.
                log::debug!("command failed: {}", e);
            },
        }

        for line in &host.output()[shown..] {
            println!("{}", line);
        }

        shown = host.output().len();

        if host.quit() {
            return Ok(());
        }
    }
}

/// Load every file in the current directory into the host, so that `:e` and completion have
/// something to work with.
fn create_host() -> Result<MemoryHost, std::io::Error> {
    let mut host = MemoryHost::new(&["hello", "world"]);

    for name in FsGlob.glob("*").unwrap_or_default() {
        if let Ok(text) = std::fs::read_to_string(&name) {
            let lines: Vec<&str> = text.lines().collect();

            host.add_file(&name, &lines[..]);
        }
    }

    return Ok(host);
}
