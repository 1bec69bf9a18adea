//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run an .ls8 image or .asm file
//! - `ls8-emu debug <program>` - Interactive debugger
//! - `ls8-emu asm <source>` - Assemble to an .ls8 image
//! - `ls8-emu disasm <image>` - Disassemble an .ls8 image

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the LS-8, an 8-bit educational microcomputer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 image or .asm file to execute
        program: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Print a trace line before each instruction
        #[arg(short, long)]
        trace: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .ls8 image or .asm file to debug
        program: String,
    },
    /// Assemble source to an .ls8 image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble an .ls8 image to readable text
    Disasm {
        /// Path to the image file
        image: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace }) => {
            run_program(&program, max_cycles, trace);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("LS-8 Emulator v0.1.0");
            println!("An 8-bit educational microcomputer emulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_program();
        }
    }
}

/// Load program bytes from an `.asm` source file or an `.ls8` image.
/// Exits the process on failure.
fn load_program_file(path: &str) -> Vec<u8> {
    use ls8::{assemble, load_image};

    let bytes = if path.ends_with(".asm") {
        // Assemble first
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(bytes) => {
                println!("📝 Assembled {} bytes", bytes.len());
                bytes
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        // Load image
        match load_image(path) {
            Ok(image) => {
                println!("📂 Loaded {} bytes", image.len());
                image.bytes
            }
            Err(e) => {
                eprintln!("❌ Failed to load image: {}", e);
                std::process::exit(1);
            }
        }
    };

    if bytes.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    bytes
}

fn run_program(path: &str, max_cycles: u64, trace: bool) {
    use ls8::Cpu;

    println!("🔧 Running: {}", path);

    let bytes = load_program_file(path);

    // Create CPU and load program
    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_program(&bytes) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("━━━ Execution ━━━");

    // Run with optional trace
    let mut cycles = 0u64;
    while cpu.is_running() && cycles < max_cycles {
        let pc = cpu.regs.pc;

        if trace {
            println!("{}", cpu.trace());
        }

        match cpu.step() {
            Ok(_) => {
                for value in cpu.take_output() {
                    println!("{}", value);
                }
                cycles += 1;
            }
            Err(e) => {
                eprintln!("❌ CPU error at PC={:02X}: {}", pc, e);
                std::process::exit(1);
            }
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cycles);
    println!("State: {:?}", cpu.state);
    println!(
        "R0-R3: {:02X} {:02X} {:02X} {:02X}",
        cpu.regs.get(0),
        cpu.regs.get(1),
        cpu.regs.get(2),
        cpu.regs.get(3)
    );
    println!(
        "R4-R7: {:02X} {:02X} {:02X} {:02X}",
        cpu.regs.get(4),
        cpu.regs.get(5),
        cpu.regs.get(6),
        cpu.regs.get(7)
    );
    println!(
        "PC: {:02X}   SP: {:02X}   FL: {}",
        cpu.regs.pc,
        cpu.regs.sp(),
        cpu.regs.flag
    );

    if cycles >= max_cycles {
        println!();
        println!(
            "⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.",
            max_cycles
        );
    }
}

fn debug_program(path: &str) {
    use ls8::tui::run_debugger;

    println!("🔍 Loading: {}", path);

    let bytes = load_program_file(path);

    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(bytes) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use ls8::assemble;
    use ls8::asm::image::save_bytes;

    let out_path = output.unwrap_or_else(|| source_path.replace(".asm", ".ls8"));

    println!("📝 Assembling: {} → {}", source_path, out_path);

    // Read source
    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    // Assemble
    let bytes = match assemble(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} bytes", bytes.len());

    // Save image
    if let Err(e) = save_bytes(&out_path, &bytes) {
        eprintln!("❌ Failed to save image: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(image_path: &str) {
    use ls8::asm::disasm::disassemble;
    use ls8::load_image;

    println!("📖 Disassembling: {}", image_path);
    println!();

    // Load image
    let image = match load_image(image_path) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    };

    // Disassemble
    let output = disassemble(&image.bytes);
    println!("{}", output);
}

fn demo_program() {
    use ls8::asm::disasm::disassemble;
    use ls8::Cpu;

    println!("━━━ LS-8 Demo ━━━");
    println!();

    // print8: LDI R0,8 / PRN R0 / HLT
    let program = [
        0b10000010, 0b00000000, 0b00001000,
        0b01000111, 0b00000000,
        0b00000001,
    ];

    println!("{}", disassemble(&program));

    let mut cpu = Cpu::new();
    cpu.load_program(&program).unwrap();
    let _ = cpu.run_limited(100);

    println!("Output:");
    for value in cpu.take_output() {
        println!("  {}", value);
    }
    println!();

    println!("✓ Core emulator working!");
}

fn run_self_test() {
    use ls8::asm::parse_image;
    use ls8::cpu::{Flag, Registers, STACK_INIT};
    use ls8::{assemble, Cpu};

    println!("━━━ LS-8 Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: Register power-on state
    print!("Register power-on state... ");
    let regs = Registers::new();
    if regs.pc == 0 && regs.sp() == STACK_INIT && regs.flag == Flag::Unset {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 2: Image parsing
    print!("Image text parsing... ");
    match parse_image("10000010 # LDI R0,8\n00000000\n00001000\n00000001\n") {
        Ok(image) if image.bytes == vec![0b10000010, 0, 8, 1] => {
            println!("✓");
            passed += 1;
        }
        _ => {
            println!("✗");
            failed += 1;
        }
    }

    // Test 3: Halt
    print!("CPU halt instruction... ");
    let mut cpu = Cpu::new();
    cpu.load_program(&[0b00000001]).unwrap();
    let result = cpu.run();
    if result.is_ok() && cpu.is_halted() {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 4: Multiply program
    print!("CPU multiply (2 × 3 = 6)... ");
    let mut cpu = Cpu::new();
    let bytes = assemble("LDI R0,2\nLDI R1,3\nMUL R0,R1\nPRN R0\nHLT\n").unwrap();
    cpu.load_program(&bytes).unwrap();
    cpu.run().unwrap();
    if cpu.output() == &[6] {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {:?}, expected [6])", cpu.output());
        failed += 1;
    }

    // Test 5: Stack push/pop
    print!("Stack push/pop... ");
    let mut cpu = Cpu::new();
    let bytes = assemble("LDI R0,99\nPUSH R0\nLDI R0,0\nPOP R1\nHLT\n").unwrap();
    cpu.load_program(&bytes).unwrap();
    cpu.run().unwrap();
    if cpu.regs.get(1) == 99 && cpu.regs.sp() == STACK_INIT {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 6: CALL and RET
    print!("CALL and RET... ");
    let mut cpu = Cpu::new();
    let source = "\
        LDI R1,DOUBLE\n\
        LDI R0,21\n\
        CALL R1\n\
        PRN R0\n\
        HLT\n\
    DOUBLE:\n\
        ADD R0,R0\n\
        RET\n";
    let bytes = assemble(source).unwrap();
    cpu.load_program(&bytes).unwrap();
    cpu.run().unwrap();
    if cpu.output() == &[42] {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {:?}, expected [42])", cpu.output());
        failed += 1;
    }

    // Test 7: CMP and JEQ
    print!("CMP and JEQ... ");
    let mut cpu = Cpu::new();
    let source = "\
        LDI R0,5\n\
        LDI R1,5\n\
        LDI R2,EQUAL\n\
        CMP R0,R1\n\
        JEQ R2\n\
        LDI R3,1\n\
        HLT\n\
    EQUAL:\n\
        LDI R3,2\n\
        HLT\n";
    let bytes = assemble(source).unwrap();
    cpu.load_program(&bytes).unwrap();
    cpu.run().unwrap();
    if cpu.regs.get(3) == 2 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {}, expected 2)", cpu.regs.get(3));
        failed += 1;
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
