//! The output-matching evaluator.
//!
//! This is NOT a Python interpreter. It is a closed pattern-matching oracle
//! tuned to the bundled lesson catalog: it scans submitted source for
//! `print(...)` occurrences, resolves each argument through a fixed priority
//! list of rules (literal > format-template > arithmetic > canned lookup),
//! then appends hardcoded output for a handful of known loop idioms. It is
//! only guaranteed correct for the catalog's solutions and close variants.
//! Do not generalize it into a real interpreter; the catalog copy and the
//! advisor fallback assume exactly these quirks.
//!
//! The arithmetic branch is the one genuinely computed path. Unlike the
//! original client-side version it never executes arbitrary expressions:
//! only numbers and `+ - * /` are accepted, anything else degrades to
//! emitting the raw argument text. No rule ever fails the whole evaluation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::EvaluationResult;

/// Non-greedy up to the first `)`, same as the original scan. Nested calls
/// therefore truncate the argument, which the canned rules compensate for.
static PRINT_CALL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"print\((.*?)\)").expect("print regex"));

/// One dispatch entry: `applies` decides on (argument, whole source),
/// `resolve` contributes zero or more output lines. First match wins.
struct PrintRule {
  name: &'static str,
  applies: fn(arg: &str, source: &str) -> bool,
  resolve: fn(arg: &str, source: &str, out: &mut Vec<String>),
}

static PRINT_RULES: &[PrintRule] = &[
  PrintRule { name: "quoted_literal", applies: is_quoted_literal, resolve: resolve_quoted_literal },
  PrintRule { name: "integer_literal", applies: is_integer_literal, resolve: resolve_integer_literal },
  PrintRule { name: "format_string", applies: is_format_string, resolve: resolve_format_string },
  PrintRule { name: "arithmetic", applies: is_arithmetic, resolve: resolve_arithmetic },
  PrintRule { name: "canned_lookup", applies: always, resolve: resolve_canned },
];

/// Source substrings with a single canned output line. Exclusive: only the
/// first matching entry emits (mirrors the original else-if chain).
static CANNED_EXCLUSIVE: &[(&str, &str)] = &[
  ("fruits[1]", "banana"),
  ("numbers.append(4)", "[1, 2, 3, 4]"),
  ("[1, 2, 3, 4]", "[1, 2, 3, 4]"),
  ("person['name']", "Alice"),
  (".upper()", "PYTHON PROGRAMMING"),
];

/// Known variable/literal combinations. Independent: every matching entry
/// emits a line.
static CANNED_VARIABLES: &[(&str, &str)] = &[
  ("age = 25", "25"),
  ("Hello!", "Hello!"),
  ("Hello, World!", "Hello, World!"),
  ("Yes, 10 is greater than 5", "Yes, 10 is greater than 5"),
];

/// Whole-source loop idioms: if every needle is present, the fixed lines are
/// appended after all print handling. Independent of each other.
static LOOP_IDIOMS: &[(&[&str], &[&str])] = &[
  (&["for i in range(1, 4)"], &["1", "2", "3"]),
  (&["while count <= 3"], &["1", "2", "3"]),
  (&["for num in numbers:", "print(num * 2)"], &["2", "4", "6", "8", "10"]),
];

/// Simulate running `source_text` and compare against `expected_output`.
///
/// Pure and deterministic: identical input always yields identical output.
/// Correctness is exact string equality after leading/trailing trim only;
/// internal whitespace and case are significant.
pub fn evaluate(source_text: &str, expected_output: &str) -> EvaluationResult {
  let mut lines: Vec<String> = Vec::new();

  for cap in PRINT_CALL.captures_iter(source_text) {
    let arg = cap[1].trim();
    for rule in PRINT_RULES {
      if (rule.applies)(arg, source_text) {
        tracing::trace!(target: "lesson", rule = rule.name, arg, "print argument resolved");
        (rule.resolve)(arg, source_text, &mut lines);
        break;
      }
    }
  }

  for (needles, output) in LOOP_IDIOMS {
    if needles.iter().all(|n| source_text.contains(n)) {
      lines.extend(output.iter().map(|s| s.to_string()));
    }
  }

  let simulated_output = lines.join("\n");
  let is_correct = simulated_output.trim() == expected_output.trim();
  EvaluationResult { simulated_output, is_correct }
}

fn always(_arg: &str, _source: &str) -> bool {
  true
}

// --- Rule 1: quoted string literal spanning the whole argument ---

fn is_quoted_literal(arg: &str, _source: &str) -> bool {
  arg.len() >= 2
    && ((arg.starts_with('\'') && arg.ends_with('\''))
      || (arg.starts_with('"') && arg.ends_with('"')))
}

fn resolve_quoted_literal(arg: &str, _source: &str, out: &mut Vec<String>) {
  out.push(arg[1..arg.len() - 1].to_string());
}

// --- Rule 2: pure integer literal ---

fn is_integer_literal(arg: &str, _source: &str) -> bool {
  !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit())
}

fn resolve_integer_literal(arg: &str, _source: &str, out: &mut Vec<String>) {
  out.push(arg.to_string());
}

// --- Rule 3: f-string, resolved via a fixed substitution table ---
//
// Closed and non-general: only the exact templates used by the catalog are
// recognized. Each entry checks the surrounding source, not the argument.

fn is_format_string(arg: &str, _source: &str) -> bool {
  arg.contains("f'") || arg.contains("f\"")
}

fn resolve_format_string(arg: &str, source: &str, out: &mut Vec<String>) {
  if source.contains("name = 'Python'") || source.contains("name = \"Python\"") {
    out.push(
      arg
        .replace("f'Hello, {name}!'", "Hello, Python!")
        .replace("f\"Hello, {name}!\"", "Hello, Python!"),
    );
  }
  if source.contains("color = input(") {
    // Canned answer: there is no stdin, so the "user" always says blue.
    out.push("Your favorite color is blue".to_string());
  }
  if source.contains("say_hello('World')") || source.contains("say_hello(\"World\")") {
    out.push("Hello, World!".to_string());
  }
}

// --- Rule 4: arithmetic, the only genuinely computed branch ---

fn is_arithmetic(arg: &str, _source: &str) -> bool {
  arg.contains('+')
}

fn resolve_arithmetic(arg: &str, _source: &str, out: &mut Vec<String>) {
  match eval_numeric(arg) {
    Some(n) => out.push(format_number(n)),
    // Malformed expression: emit the raw fragment, never abort.
    None => out.push(arg.to_string()),
  }
}

// --- Rule 5: canned source-substring lookup, independent of the argument ---

fn resolve_canned(_arg: &str, source: &str, out: &mut Vec<String>) {
  for (needle, output) in CANNED_EXCLUSIVE {
    if source.contains(needle) {
      out.push(output.to_string());
      return;
    }
  }
  for (needle, output) in CANNED_VARIABLES {
    if source.contains(needle) {
      out.push(output.to_string());
    }
  }
}

// --- Restricted numeric expression evaluation ---
//
// Grammar: expr := term (('+'|'-') term)* ; term := factor (('*'|'/') factor)* ;
// factor := number | '-' factor. Any other token rejects the expression.

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
  Num(f64),
  Plus,
  Minus,
  Star,
  Slash,
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
  let mut tokens = Vec::new();
  let mut chars = expr.chars().peekable();
  while let Some(&c) = chars.peek() {
    match c {
      ' ' | '\t' => {
        chars.next();
      }
      '+' => {
        chars.next();
        tokens.push(Token::Plus);
      }
      '-' => {
        chars.next();
        tokens.push(Token::Minus);
      }
      '*' => {
        chars.next();
        tokens.push(Token::Star);
      }
      '/' => {
        chars.next();
        tokens.push(Token::Slash);
      }
      '0'..='9' | '.' => {
        let mut num = String::new();
        while let Some(&d) = chars.peek() {
          if d.is_ascii_digit() || d == '.' {
            num.push(d);
            chars.next();
          } else {
            break;
          }
        }
        tokens.push(Token::Num(num.parse().ok()?));
      }
      _ => return None,
    }
  }
  if tokens.is_empty() {
    None
  } else {
    Some(tokens)
  }
}

struct Parser<'a> {
  tokens: &'a [Token],
  pos: usize,
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<Token> {
    self.tokens.get(self.pos).copied()
  }

  fn next(&mut self) -> Option<Token> {
    let t = self.peek()?;
    self.pos += 1;
    Some(t)
  }

  fn expr(&mut self) -> Option<f64> {
    let mut acc = self.term()?;
    while let Some(op) = self.peek() {
      match op {
        Token::Plus => {
          self.next();
          acc += self.term()?;
        }
        Token::Minus => {
          self.next();
          acc -= self.term()?;
        }
        _ => return None,
      }
    }
    Some(acc)
  }

  fn term(&mut self) -> Option<f64> {
    let mut acc = self.factor()?;
    loop {
      match self.peek() {
        Some(Token::Star) => {
          self.next();
          acc *= self.factor()?;
        }
        Some(Token::Slash) => {
          self.next();
          acc /= self.factor()?;
        }
        _ => return Some(acc),
      }
    }
  }

  fn factor(&mut self) -> Option<f64> {
    match self.next()? {
      Token::Num(n) => Some(n),
      Token::Minus => Some(-self.factor()?),
      _ => None,
    }
  }
}

/// Evaluate a numeric `+ - * /` expression. Returns None for anything outside
/// that grammar or for non-finite results (division by zero).
fn eval_numeric(expr: &str) -> Option<f64> {
  let tokens = tokenize(expr)?;
  let mut parser = Parser { tokens: &tokens, pos: 0 };
  let value = parser.expr()?;
  if parser.pos != tokens.len() || !value.is_finite() {
    return None;
  }
  Some(value)
}

/// Integer results print without a decimal point, like Python/JS would show
/// them for the catalog's expressions.
fn format_number(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    format!("{}", n)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::builtin_lessons;

  #[test]
  fn every_catalog_solution_passes_its_own_lesson() {
    for lesson in builtin_lessons() {
      let r = evaluate(&lesson.solution, &lesson.expected_output);
      assert!(
        r.is_correct,
        "lesson {} ({}) failed: simulated {:?}, expected {:?}",
        lesson.id, lesson.title, r.simulated_output, lesson.expected_output
      );
    }
  }

  #[test]
  fn quoted_literal_prints_verbatim() {
    let r = evaluate("print('Hello, World!')", "Hello, World!");
    assert_eq!(r.simulated_output, "Hello, World!");
    assert!(r.is_correct);
  }

  #[test]
  fn variable_print_resolves_via_canned_table() {
    let r = evaluate("age = 25\nprint(age)", "25");
    assert_eq!(r.simulated_output, "25");
    assert!(r.is_correct);
  }

  #[test]
  fn arithmetic_is_genuinely_computed() {
    let r = evaluate("print(15 + 27)", "42");
    assert_eq!(r.simulated_output, "42");
    assert!(r.is_correct);
  }

  #[test]
  fn range_loop_appends_fixed_lines() {
    let r = evaluate("for i in range(1, 4):\n    print(i)", "1\n2\n3");
    assert_eq!(r.simulated_output, "1\n2\n3");
    assert!(r.is_correct);
  }

  #[test]
  fn evaluation_is_idempotent() {
    let src = "numbers = [1, 2, 3]\nnumbers.append(4)\nprint(numbers)";
    let a = evaluate(src, "[1, 2, 3, 4]");
    let b = evaluate(src, "[1, 2, 3, 4]");
    assert_eq!(a, b);
    assert!(a.is_correct);
  }

  #[test]
  fn multiple_prints_join_with_newlines_in_order() {
    let r = evaluate("print('a')\nprint(7)\nprint('b')", "a\n7\nb");
    assert_eq!(r.simulated_output, "a\n7\nb");
    assert!(r.is_correct);
  }

  #[test]
  fn malformed_arithmetic_degrades_to_raw_text() {
    let r = evaluate("print(x + y)", "whatever");
    assert_eq!(r.simulated_output, "x + y");
    assert!(!r.is_correct);
  }

  #[test]
  fn arithmetic_rejects_anything_beyond_numbers_and_operators() {
    assert_eq!(eval_numeric("15 + 27"), Some(42.0));
    assert_eq!(eval_numeric("2 * 3 + 4"), Some(10.0));
    assert_eq!(eval_numeric("1 + 10 / 4"), Some(3.5));
    assert_eq!(eval_numeric("-5 + 7"), Some(2.0));
    assert!(eval_numeric("__import__('os')").is_none());
    assert!(eval_numeric("1 + open('x')").is_none());
    assert!(eval_numeric("1 / 0").is_none());
    assert!(eval_numeric("").is_none());
  }

  #[test]
  fn fractional_results_keep_the_decimal_point() {
    let r = evaluate("print(1 + 10 / 4)", "3.5");
    assert_eq!(r.simulated_output, "3.5");
    assert!(r.is_correct);
  }

  #[test]
  fn input_template_emits_the_canned_answer() {
    let src = "color = input('fav? ')\nprint(f'Your favorite color is {color}')";
    let r = evaluate(src, "Your favorite color is blue");
    assert!(r.is_correct);
  }

  #[test]
  fn unmatched_format_string_contributes_nothing() {
    let r = evaluate("print(f'{mystery}')", "");
    assert_eq!(r.simulated_output, "");
    assert!(r.is_correct);
  }

  #[test]
  fn trailing_whitespace_is_forgiven_but_case_is_not() {
    assert!(evaluate("print('Hello, World!')", "Hello, World!\n").is_correct);
    assert!(!evaluate("print('hello, world!')", "Hello, World!").is_correct);
  }

  #[test]
  fn while_loop_idiom_appends_after_print_lines() {
    let src = "print('start')\ncount = 1\nwhile count <= 3:\n    print(count)\n    count += 1";
    let r = evaluate(src, "start\n1\n2\n3");
    assert_eq!(r.simulated_output, "start\n1\n2\n3");
    assert!(r.is_correct);
  }
}
