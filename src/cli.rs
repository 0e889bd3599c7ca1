// CLI definitions using clap

use clap::{Parser, Subcommand};
use howler_device::input::parse_key;
use howler_device::{Input, LedChannel, Modifiers};
use howler_driver::control::{byte, Control};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "howlerctl")]
#[command(author, version, about = "Wolfware Howler arcade controller tool")]
#[command(propagate_version = true)]
#[command(after_help = "CONTROL is one of:\n  J1 - J4: Joystick 1 to Joystick 4\n  \
    B1 - B26: Button 1 to Button 26\n  H1 - H2: High Power LED 1 or 2\n\n\
    INPUT is J1U - J4R (joystick and direction) or B1 - B26")]
pub struct Cli {
    /// Enable transport monitoring (prints all commands/responses)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long, global = true)]
    pub hex: bool,

    /// Howler to talk to when several are attached (0-based)
    #[arg(short, long, global = true, value_name = "N")]
    pub device: Option<usize>,

    /// USB transfer timeout in milliseconds (default: wait forever)
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Skip reading LED state back when the device is opened
    #[arg(long, global = true)]
    pub no_prime: bool,

    /// Config file path (default: ~/.config/howler/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// Print the firmware version
    #[command(visible_aliases = ["firmware", "fw"])]
    GetFirmware,

    /// Print LED colours (all LEDs when CONTROL is omitted)
    #[command(visible_aliases = ["led"])]
    GetLed {
        /// J1-J4, B1-B26 or H1-H2
        control: Option<Control>,
    },

    /// List attached Howlers
    #[command(visible_aliases = ["ls"])]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List key names accepted by set-key
    #[command(visible_aliases = ["keys"])]
    ListSupportedKeys,

    // === Set Commands ===
    /// Set one colour channel of an LED
    #[command(visible_aliases = ["channel"])]
    SetLedChannel {
        /// J1-J4, B1-B26 or H1-H2
        control: Control,
        /// red, green or blue
        channel: LedChannel,
        /// 0-255
        #[arg(value_parser = byte("LED value"))]
        value: u8,
    },

    /// Set the colour of an LED
    #[command(visible_aliases = ["rgb"])]
    SetLed {
        /// J1-J4, B1-B26 or H1-H2
        control: Control,
        /// 0-255
        #[arg(value_parser = byte("Red LED"))]
        red: u8,
        /// 0-255
        #[arg(value_parser = byte("Green LED"))]
        green: u8,
        /// 0-255
        #[arg(value_parser = byte("Blue LED"))]
        blue: u8,
    },

    /// Set the global LED brightness
    #[command(visible_aliases = ["brightness"])]
    SetBrightness {
        /// 0-255
        #[arg(value_parser = byte("brightness"))]
        level: u8,
    },

    /// Map an input to a keyboard key
    #[command(visible_aliases = ["map"])]
    SetKey {
        /// J1U-J4R or B1-B26
        input: Input,
        /// Key name (see list-supported-keys) or usage code (0x04, 4)
        #[arg(value_parser = parse_key)]
        key: u8,
        /// Modifier names joined with '+' (e.g. LCtrl+LShift) or a bit mask
        modifiers: Option<Modifiers>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use howler_device::LedGroup;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_set_led_args() {
        let cli = Cli::try_parse_from(["howlerctl", "-d", "1", "set-led", "b3", "1", "2", "255"])
            .unwrap();
        assert_eq!(cli.device, Some(1));
        match cli.command {
            Commands::SetLed {
                control,
                red,
                green,
                blue,
            } => {
                assert_eq!(control.group, LedGroup::Button);
                assert_eq!(control.index, 3);
                assert_eq!((red, green, blue), (1, 2, 255));
            }
            _ => panic!("Expected SetLed"),
        }
    }

    #[test]
    fn test_invalid_args_rejected() {
        assert!(Cli::try_parse_from(["howlerctl", "set-led", "B27", "1", "2", "3"]).is_err());
        assert!(Cli::try_parse_from(["howlerctl", "set-led", "B1", "1", "2", "256"]).is_err());
        assert!(
            Cli::try_parse_from(["howlerctl", "set-led-channel", "J1", "purple", "1"]).is_err()
        );
        assert!(Cli::try_parse_from(["howlerctl", "set-key", "J5U", "A"]).is_err());
        assert!(Cli::try_parse_from(["howlerctl"]).is_err());
    }

    #[test]
    fn test_get_led_optional_control() {
        let cli = Cli::try_parse_from(["howlerctl", "get-led"]).unwrap();
        assert!(matches!(cli.command, Commands::GetLed { control: None }));

        let cli = Cli::try_parse_from(["howlerctl", "led", "H2"]).unwrap();
        assert!(matches!(cli.command, Commands::GetLed { control: Some(_) }));
    }

    #[test]
    fn test_set_key_args() {
        let cli = Cli::try_parse_from(["howlerctl", "set-key", "j2l", "Space", "LCtrl+LShift"])
            .unwrap();
        match cli.command {
            Commands::SetKey {
                input,
                key,
                modifiers,
            } => {
                assert_eq!(input.to_string(), "J2L");
                assert_eq!(key, 0x2C);
                assert_eq!(
                    modifiers,
                    Some(Modifiers::LEFT_CTRL | Modifiers::LEFT_SHIFT)
                );
            }
            _ => panic!("Expected SetKey"),
        }
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(["howlerctl", "--help"])
            .err()
            .unwrap();
        assert!(!err.use_stderr());

        let err = Cli::try_parse_from(["howlerctl", "bogus"]).err().unwrap();
        assert!(err.use_stderr());
    }
}
