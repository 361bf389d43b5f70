//! Renders a machine as a deterministic, line oriented listing. Intended for
//! debugging sessions and golden tests, not for machine consumption.

use crate::types::*;
use std::fmt::Write;

/// Produces a textual listing of every node, followed by the interned bitmap
/// tables. Output is a pure function of the machine.
pub fn disassemble(machine: &Machine) -> String {
  let mut out = String::new();

  for (ix, node) in machine.nodes().iter().enumerate() {
    let label = machine.entry_label(ix);
    let name = machine.name_of(ix).unwrap_or("");

    if machine.state(name) == Some(ix) {
      let _ = writeln!(out, "{label} [{name}]:");
    } else {
      let _ = writeln!(out, "{label}:");
    }

    let mut body = String::new();
    write_inst(&mut body, machine, &node.body);
    let _ = writeln!(out, "  {body}");
  }

  let tables = machine.bitmap_tables();

  if !tables.is_empty() {
    let _ = writeln!(out, "bitmaps:");
    for (id, bitmap) in tables {
      let count = bitmap.0.iter().filter(|b| **b).count();
      let _ = writeln!(out, "  bitmap{id}: {count} bytes");
    }
  }

  out
}

fn write_inst(out: &mut String, machine: &Machine, inst: &Instruction) {
  match inst {
    Instruction::Consumer(consumer) => write_consumer(out, machine, consumer),

    Instruction::Select(selector, arms, otherwise) => {
      let _ = write!(out, "select {} {{ ", fmt_selector(selector));
      for (value, inst) in arms {
        let _ = write!(out, "{value} -> {{ ");
        write_inst(out, machine, inst);
        let _ = write!(out, " }} ");
      }
      let _ = write!(out, "_ -> {{ ");
      write_inst(out, machine, otherwise);
      let _ = write!(out, " }} }}");
    }

    Instruction::Next(n, next) => {
      let _ = write!(out, "next {n} then ");
      write_inst(out, machine, next);
    }

    Instruction::Store(prop, data, next) => {
      match data {
        Some(byte) => {
          let _ = write!(out, "store {prop} 0x{byte:02X} then ");
        }
        None => {
          let _ = write!(out, "store {prop} byte then ");
        }
      }
      write_inst(out, machine, next);
    }

    Instruction::Capture(prop, next) => {
      let _ = write!(out, "capture {prop} then ");
      write_inst(out, machine, next);
    }

    Instruction::Close(prop, next) => {
      let _ = write!(out, "close {prop} then ");
      write_inst(out, machine, next);
    }

    Instruction::Call(call, next) => {
      let _ = write!(out, "call {} then ", fmt_call(call));
      write_inst(out, machine, next);
    }

    Instruction::Goto(target) => {
      let _ = write!(out, "goto {}", machine.entry_label(*target));
    }

    Instruction::Error(code) => {
      let _ = write!(out, "error {code}");
    }
  }
}

fn write_consumer(out: &mut String, machine: &Machine, consumer: &Consumer) {
  match consumer {
    Consumer::Is { subject, ok, err } => {
      let _ = write!(out, "is \"{}\" ok={{ ", subject.escape_ascii());
      write_inst(out, machine, ok);
      let _ = write!(out, " }} err={{ ");
      write_inst(out, machine, err);
      let _ = write!(out, " }}");
    }

    Consumer::Char { byte, ok, err } => {
      let _ = write!(out, "char 0x{byte:02X} ok={{ ");
      write_inst(out, machine, ok);
      let _ = write!(out, " }} err={{ ");
      write_inst(out, machine, err);
      let _ = write!(out, " }}");
    }

    Consumer::Range { range, ok, err } => {
      let _ = write!(out, "range [{range}] ok={{ ");
      write_inst(out, machine, ok);
      let _ = write!(out, " }} err={{ ");
      write_inst(out, machine, err);
      let _ = write!(out, " }}");
    }

    Consumer::Map { chars, ok, err } => {
      let id = machine.bitmap_id(chars).unwrap_or(usize::MAX);
      let _ = write!(out, "map bitmap{id} {chars} ok={{ ");
      write_inst(out, machine, ok);
      let _ = write!(out, " }} err={{ ");
      write_inst(out, machine, err);
      let _ = write!(out, " }}");
    }

    Consumer::Chars { arms, otherwise } => {
      let _ = write!(out, "chars {{ ");
      for (byte, inst) in arms {
        let _ = write!(out, "0x{byte:02X} -> {{ ");
        write_inst(out, machine, inst);
        let _ = write!(out, " }} ");
      }
      let _ = write!(out, "_ -> {{ ");
      write_inst(out, machine, otherwise);
      let _ = write!(out, " }} }}");
    }

    Consumer::Mixed { arms, otherwise } => {
      let _ = write!(out, "mixed {{ ");
      for (check, inst) in arms {
        let _ = write!(out, "{} -> {{ ", fmt_check(machine, check));
        write_inst(out, machine, inst);
        let _ = write!(out, " }} ");
      }
      let _ = write!(out, "_ -> {{ ");
      write_inst(out, machine, otherwise);
      let _ = write!(out, " }} }}");
    }

    Consumer::Consume { prop, ok } => {
      let _ = write!(out, "consume {prop} ok={{ ");
      write_inst(out, machine, ok);
      let _ = write!(out, " }}");
    }
  }
}

fn fmt_check(machine: &Machine, check: &Check) -> String {
  match check {
    Check::Byte(byte) => format!("0x{byte:02X}"),
    Check::Range(range) => format!("[{range}]"),
    Check::Map(chars) => {
      let id = machine.bitmap_id(chars).unwrap_or(usize::MAX);
      format!("bitmap{id}")
    }
  }
}

fn fmt_selector(selector: &Selector) -> String {
  match selector {
    Selector::Call(call) => fmt_call(call),
    Selector::Method(prop) => format!("method {prop}"),
  }
}

fn fmt_call(call: &Call) -> String {
  match call {
    Call::Arbitrary(ix) => format!("fn#{ix}"),
    Call::MulAdd(base, prop) => format!("mul-add {} {prop}", fmt_base(*base)),
    Call::LoadNum(prop) => format!("load-num {prop}"),
    Call::CallStore(prop, ix) => format!("call-store {prop} fn#{ix}"),
    Call::Store(prop, value) => format!("store-imm {prop} {value}"),
  }
}

fn fmt_base(base: Base) -> &'static str {
  match base {
    Base::Octal => "octal",
    Base::Decimal => "decimal",
    Base::Hex => "hex",
  }
}
