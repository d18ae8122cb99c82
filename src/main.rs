//! `sms-pdu`: decode and encode SMS PDUs from the command line, printing JSON.
//!
//! ```text
//! sms-pdu decode --type sms-submit 0011000B916407281553F80000AA0AE8329BFD4697D9EC37
//! sms-pdu encode --to +46708251358 --message hellohello --validity 3d
//! ```
//!
//! Set `RUST_LOG=debug` to see what the codec is doing.

#[macro_use] extern crate log;

use argh::FromArgs;
use failure::Error;
use sms_pdu_codec::*;

/// Decode and encode SMS PDUs (SMS-DELIVER and SMS-SUBMIT).
#[derive(FromArgs)]
struct CliArgs {
    #[argh(subcommand)]
    command: Command
}
#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Decode(DecodeArgs),
    Encode(EncodeArgs)
}
/// Decode a hex PDU.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct DecodeArgs {
    /// the PDU type: sms-deliver (default) or sms-submit
    #[argh(option, long = "type", default = "PduType::Deliver")]
    pdu_type: PduType,
    /// fail if TP-MTI doesn't match the PDU type
    #[argh(switch)]
    strict: bool,
    /// the PDU, as hex (may be split across arguments)
    #[argh(positional)]
    hex: Vec<String>
}
/// Encode a message as a PDU.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct EncodeArgs {
    /// the PDU type: sms-submit (default) or sms-deliver
    #[argh(option, long = "type", default = "PduType::Submit")]
    pdu_type: PduType,
    /// the recipient telephone number
    #[argh(option, short = 't', default = "String::new()")]
    to: String,
    /// the message to send
    #[argh(option, short = 'm')]
    message: String,
    /// the SMSC number (default: use the phone's default SMSC)
    #[argh(option)]
    smsc: Option<String>,
    /// the text encoding: 7bit (default), 8bit or ucs2
    #[argh(option, short = 'e', default = "Alphabet::Gsm7")]
    encoding: Alphabet,
    /// request a status report
    #[argh(switch)]
    status_report: bool,
    /// set the reply path flag
    #[argh(switch)]
    reply_path: bool,
    /// validity period: 12h, 1d, 3d, 1w or max
    #[argh(option)]
    validity: Option<String>,
    /// the sender (sms-deliver only)
    #[argh(option, short = 'f')]
    from: Option<String>,
    /// the service centre timestamp, e.g. "2024-05-01 12:00:00 +01:00" (sms-deliver only)
    #[argh(option)]
    timestamp: Option<SmscTimestamp>,
    /// the message reference (sms-submit only)
    #[argh(option, default = "0")]
    reference: u8,
    /// split long messages into concatenated parts
    #[argh(switch)]
    concatenate: bool,
    /// the concatenation reference (default: random)
    #[argh(option)]
    concat_reference: Option<u8>
}

fn run(args: CliArgs) -> Result<(), Error> {
    match args.command {
        Command::Decode(d) => {
            let hex = d.hex.join("");
            let decoder = PduDecoder::with_options(DecodeOptions { strict_mti: d.strict });
            let report = decoder.decode(d.pdu_type, &hex)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        Command::Encode(e) => {
            if e.pdu_type == PduType::Submit && e.to.is_empty() {
                Err(PduError::MissingParameter("to"))?
            }
            let req = EncodeRequest {
                pdu_type: e.pdu_type,
                message: e.message,
                recipient: e.to,
                smsc: e.smsc,
                encoding: e.encoding,
                status_report: e.status_report,
                reply_path: e.reply_path,
                validity_period: e.validity,
                sender: e.from,
                timestamp: e.timestamp,
                message_reference: e.reference,
                protocol_identifier: 0,
                udh: None
            };
            let encoder = PduEncoder::new();
            if e.concatenate {
                let parts = encoder.encode_concatenated(&req, e.concat_reference)?;
                info!("encoded {} part(s)", parts.len());
                println!("{}", serde_json::to_string_pretty(&parts)?);
            }
            else {
                let report = encoder.encode(&req)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }
    Ok(())
}
fn main() {
    env_logger::init();
    let args: CliArgs = argh::from_env();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        ::std::process::exit(1);
    }
}
