use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process;

use argh::FromArgs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intcode::debugger::Debugger;
use intcode::program::Program;
use intcode::vm::{Config, Error, Vm, MAX_STEPS};

/// IntComputer: a simple machine code interpreter.
///
/// In debug mode each `$` prompt takes one command: (s)top, (n)ext or an
/// empty line, (d)ump [start] [end], (r)un to halt, (m)emory [address...],
/// (i)nstruction pointer.
#[derive(FromArgs)]
struct Arguments {
  /// comma separated program memory
  #[argh(positional)]
  program: Option<String>,

  /// file whose first line holds the comma separated program memory
  #[argh(option, short = 'f')]
  file: Option<String>,

  /// show a memory dump before and after execution
  #[argh(switch)]
  dump: bool,

  /// step through the program interactively
  #[argh(switch, short = 'd')]
  debug: bool,

  /// text used as input in place of standard input
  #[argh(option)]
  input: Option<String>,

  /// steps to allow before giving up on a program that never halts
  #[argh(option)]
  max_steps: Option<usize>,
}

fn parse_arguments() -> Arguments {
  let strings: Vec<String> = std::env::args().collect();
  let name = strings.first().map(String::as_str).unwrap_or("intcode");
  let mut args: Vec<&str> = strings
    .iter()
    .skip(1)
    .map(|arg| if arg == "-h" { "--help" } else { arg.as_str() })
    .collect();
  if args.is_empty() {
    args.push("--help");
  }
  match Arguments::from_args(&[name], &args) {
    Ok(arguments) => arguments,
    Err(exit) => match exit.status {
      Ok(()) => {
        println!("{}", exit.output);
        process::exit(0);
      }
      Err(()) => {
        eprintln!("{}", exit.output);
        process::exit(-1);
      }
    },
  }
}

fn load_text(arguments: &Arguments) -> Result<String, String> {
  if let Some(program) = &arguments.program {
    return Ok(program.clone());
  }
  let Some(path) = &arguments.file else {
    return Err("a program has to be passed as the first argument or with -f".to_string());
  };
  let file = File::open(path).map_err(|err| format!("could not open input file {path}: {err}"))?;
  let mut line = String::new();
  BufReader::new(file)
    .read_line(&mut line)
    .map_err(|err| format!("could not read input file {path}: {err}"))?;
  Ok(line)
}

fn session<I, O, C>(
  mut vm: Vm<I, O>,
  debugger: Option<Debugger<C, io::Stdout>>,
  dump: bool,
) -> Result<(), Error>
where
  I: BufRead,
  O: Write,
  C: BufRead,
{
  if dump {
    print!("{}", vm.dump(0..vm.memory().len()));
  }
  match debugger {
    Some(mut debugger) => {
      let outcome = debugger.run(&mut vm)?;
      info!(?outcome, ip = vm.ip(), "left debugger");
    }
    None => vm.execute()?,
  }
  if dump {
    print!("{}", vm.dump(0..vm.memory().len()));
  }
  Ok(())
}

fn run(arguments: &Arguments, text: &str) -> Result<(), Error> {
  let program: Program = text.parse()?;
  let config = Config {
    max_steps: arguments.max_steps.unwrap_or(MAX_STEPS),
    interactive: arguments.input.is_none(),
    ..Config::default()
  };
  // Standard input is locked exactly once. Without `--input` the machine owns
  // the lock and the debugger reads its commands through it.
  match &arguments.input {
    Some(input) => {
      let vm = Vm::with_io(program, input.as_bytes(), io::stdout()).with_config(config);
      let debugger = arguments
        .debug
        .then(|| Debugger::new(io::stdin().lock(), io::stdout()));
      session(vm, debugger, arguments.dump)
    }
    None => {
      let vm = Vm::with_io(program, io::stdin().lock(), io::stdout()).with_config(config);
      let debugger = arguments.debug.then(|| Debugger::sharing_input(io::stdout()));
      session(vm, debugger, arguments.dump)
    }
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let arguments = parse_arguments();
  let text = match load_text(&arguments) {
    Ok(text) => text,
    Err(message) => {
      eprintln!("{message}");
      process::exit(-1);
    }
  };
  if text.trim().is_empty() {
    return;
  }

  if let Err(err) = run(&arguments, &text) {
    let _ = io::stdout().flush();
    eprintln!("{err}");
    process::exit(1);
  }
}
