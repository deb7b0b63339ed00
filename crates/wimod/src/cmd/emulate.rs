use wimod_hci::{DeviceInfo, Emulator, EmulatorConfig};

use crate::cmd::EmulateArgs;
use crate::exit::{hci_error, CliResult, SUCCESS};

pub fn run(args: EmulateArgs) -> CliResult<i32> {
    let emulator = Emulator::new(EmulatorConfig {
        info: DeviceInfo::new(args.module_type, args.address, args.device_id),
        status: args.status,
    });

    #[cfg(unix)]
    {
        emulator
            .serve_socket(&args.path, args.max_connections)
            .map_err(|err| hci_error("emulator failed", err))?;
        Ok(SUCCESS)
    }

    #[cfg(not(unix))]
    {
        let _ = (emulator, args.max_connections, hci_error, SUCCESS);
        Err(crate::exit::CliError::new(
            crate::exit::USAGE,
            format!("emulate requires unix sockets: {}", args.path.display()),
        ))
    }
}
