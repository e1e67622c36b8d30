//! The built-in lesson catalog and its ordering invariant.
//!
//! The catalog is an ordered, immutable list of lessons. Ids are dense
//! starting at 1 and the vector order is the progression order, so lookups
//! are plain index math. A config-supplied bank may replace the built-ins,
//! but only if it satisfies the same invariant (see `Catalog::from_lessons`).

use crate::domain::Lesson;

/// Ordered, immutable lesson list. `lessons[i].id == i + 1` always holds.
#[derive(Clone, Debug)]
pub struct Catalog {
  lessons: Vec<Lesson>,
}

impl Catalog {
  /// Build a catalog from an arbitrary lesson list, enforcing dense ids 1..N.
  pub fn from_lessons(lessons: Vec<Lesson>) -> Result<Self, String> {
    if lessons.is_empty() {
      return Err("catalog must contain at least one lesson".into());
    }
    for (i, l) in lessons.iter().enumerate() {
      let want = (i + 1) as u32;
      if l.id != want {
        return Err(format!("lesson ids must be dense 1..N: position {} has id {}", i, l.id));
      }
    }
    Ok(Self { lessons })
  }

  pub fn builtin() -> Self {
    // builtin_lessons() is constructed dense by hand; the check is kept as a
    // startup assertion against editing mistakes.
    Self::from_lessons(builtin_lessons()).unwrap_or_else(|e| panic!("built-in catalog invalid: {}", e))
  }

  /// Look up a lesson by id. Out-of-range ids are a not-found condition.
  pub fn get(&self, id: u32) -> Option<&Lesson> {
    if id == 0 {
      return None;
    }
    self.lessons.get((id - 1) as usize)
  }

  pub fn len(&self) -> usize {
    self.lessons.len()
  }

  pub fn lessons(&self) -> &[Lesson] {
    &self.lessons
  }
}

fn lesson(
  id: u32,
  title: &str,
  description: &str,
  concept: &str,
  task: &str,
  hint: &str,
  starter_code: &str,
  expected_output: &str,
  solution: &str,
) -> Lesson {
  Lesson {
    id,
    title: title.into(),
    description: description.into(),
    concept: concept.into(),
    task: task.into(),
    hint: hint.into(),
    starter_code: starter_code.into(),
    expected_output: expected_output.into(),
    solution: solution.into(),
  }
}

/// The fixed 15-lesson Python course. The evaluator's pattern tables are tuned
/// to exactly these solutions; adding lessons means extending those tables.
pub fn builtin_lessons() -> Vec<Lesson> {
  vec![
    lesson(
      1,
      "Hello, World!",
      "Write your first Python program.",
      "print() displays text on the screen. Text goes inside quotes.\nExample:\nprint('Hi!')\nShows: Hi!",
      "Use print() to display exactly: Hello, World!",
      "Put the text in quotes inside print(). Match capitalization and punctuation exactly.",
      "# Write your first program below\n",
      "Hello, World!",
      "print('Hello, World!')",
    ),
    lesson(
      2,
      "Variables and Numbers",
      "Store a number in a variable and display it.",
      "Variables store values under a name.\nExample:\nage = 25\nprint(age)\nShows: 25",
      "Create a variable called age with the value 25, then print it.",
      "First assign with age = 25, then display it with print(age).",
      "# Create a variable and print it\n",
      "25",
      "age = 25\nprint(age)",
    ),
    lesson(
      3,
      "String Variables",
      "Combine text and variables with f-strings.",
      "An f-string inserts a variable's value into text.\nExample:\nname = 'Python'\nprint(f'Hello, {name}!')\nShows: Hello, Python!",
      "Create a variable name with the value 'Python' and print: Hello, Python!",
      "Use an f-string: print(f'Hello, {name}!') after assigning name = 'Python'.",
      "# Create a string variable and greet it\n",
      "Hello, Python!",
      "name = 'Python'\nprint(f'Hello, {name}!')",
    ),
    lesson(
      4,
      "User Input",
      "Read a value from the user with input().",
      "input() asks the user for text and returns it.\nExample:\ncolor = input('Favorite color? ')\nprint(f'Your favorite color is {color}')",
      "Ask for a favorite color with input() and print: Your favorite color is blue",
      "Store the result of input() in a variable named color, then use an f-string to print it.",
      "# Get user input and display it\n",
      "Your favorite color is blue",
      "color = input('What is your favorite color? ')\nprint(f'Your favorite color is {color}')",
    ),
    lesson(
      5,
      "Basic Math",
      "Let Python do arithmetic for you.",
      "Python evaluates math with + - * /.\nExample:\nprint(2 + 3)\nShows: 5",
      "Print the sum of 15 and 27.",
      "Put the addition directly inside print(): print(15 + 27).",
      "# Calculate a sum and print it\n",
      "42",
      "print(15 + 27)",
    ),
    lesson(
      6,
      "Conditionals",
      "Make decisions with if statements.",
      "if runs code only when a condition is true.\nExample:\nif number > 5:\n    print('big')",
      "Set number to 10 and, if it is greater than 5, print: Yes, 10 is greater than 5",
      "Remember the colon after the condition and the indentation of the print line.",
      "# Use an if statement\n",
      "Yes, 10 is greater than 5",
      "number = 10\nif number > 5:\n    print('Yes, 10 is greater than 5')",
    ),
    lesson(
      7,
      "For Loops",
      "Repeat code a fixed number of times.",
      "for with range() counts over numbers.\nExample:\nfor i in range(1, 4):\n    print(i)\nShows: 1 2 3 on separate lines",
      "Use a for loop with range(1, 4) to print the numbers 1 to 3.",
      "range(1, 4) produces 1, 2, 3 - the end value is not included.",
      "# Use a for loop\n",
      "1\n2\n3",
      "for i in range(1, 4):\n    print(i)",
    ),
    lesson(
      8,
      "While Loops",
      "Repeat code while a condition holds.",
      "while repeats until its condition becomes false.\nExample:\ncount = 1\nwhile count <= 3:\n    print(count)\n    count += 1",
      "Use a while loop to print the numbers 1 to 3.",
      "Start with count = 1, loop while count <= 3, and increment with count += 1.",
      "# Use a while loop\n",
      "1\n2\n3",
      "count = 1\nwhile count <= 3:\n    print(count)\n    count += 1",
    ),
    lesson(
      9,
      "Lists Basics",
      "Store several values in one list.",
      "Lists hold ordered values; indexing starts at 0.\nExample:\nfruits = ['apple', 'banana', 'orange']\nprint(fruits[1])\nShows: banana",
      "Create a list of fruits and print the second one.",
      "The second element is at index 1: fruits[1].",
      "# Create a list and print one element\n",
      "banana",
      "fruits = ['apple', 'banana', 'orange']\nprint(fruits[1])",
    ),
    lesson(
      10,
      "List Operations",
      "Grow a list with append().",
      ".append() adds an element to the end of a list.\nExample:\nnumbers = [1, 2, 3]\nnumbers.append(4)\nprint(numbers)\nShows: [1, 2, 3, 4]",
      "Create the list [1, 2, 3], append 4, and print the list.",
      "Call numbers.append(4) before printing the whole list.",
      "# Create a list and add to it\n",
      "[1, 2, 3, 4]",
      "numbers = [1, 2, 3]\nnumbers.append(4)\nprint(numbers)",
    ),
    lesson(
      11,
      "Functions Basics",
      "Package code into a reusable function.",
      "def defines a function; calling it runs the body.\nExample:\ndef greet():\n    print('Hello!')\n\ngreet()",
      "Define a function greet() that prints Hello! and call it.",
      "Define with def greet(): then call it with greet() - don't forget the call.",
      "# Define a function and call it\n",
      "Hello!",
      "def greet():\n    print('Hello!')\n\ngreet()",
    ),
    lesson(
      12,
      "Function Parameters",
      "Pass values into functions.",
      "Parameters let the caller customize what a function does.\nExample:\ndef say_hello(name):\n    print(f'Hello, {name}!')\n\nsay_hello('World')",
      "Define say_hello(name) that greets the given name, and call it with 'World'.",
      "Use an f-string inside the function body and pass 'World' when calling.",
      "# Define a function with a parameter\n",
      "Hello, World!",
      "def say_hello(name):\n    print(f'Hello, {name}!')\n\nsay_hello('World')",
    ),
    lesson(
      13,
      "Dictionaries",
      "Store key-value pairs.",
      "Dictionaries map keys to values.\nExample:\nperson = {'name': 'Alice', 'age': 30}\nprint(person['name'])\nShows: Alice",
      "Create a person dictionary and print the value stored under 'name'.",
      "Look up a value with square brackets and the key: person['name'].",
      "# Create a dictionary and look up a value\n",
      "Alice",
      "person = {'name': 'Alice', 'age': 30}\nprint(person['name'])",
    ),
    lesson(
      14,
      "String Methods",
      "Transform text with string methods.",
      "Strings have methods like .upper() and .lower().\nExample:\ntext = 'python programming'\nprint(text.upper())\nShows: PYTHON PROGRAMMING",
      "Create a string 'python programming' and print it in uppercase.",
      "Call .upper() on the variable inside print().",
      "# Use a string method\n",
      "PYTHON PROGRAMMING",
      "text = 'python programming'\nprint(text.upper())",
    ),
    lesson(
      15,
      "Final Challenge",
      "Combine lists and loops.",
      "Loop over a list and compute with each element.\nExample:\nnumbers = [1, 2, 3, 4, 5]\nfor num in numbers:\n    print(num * 2)",
      "Loop over the list [1, 2, 3, 4, 5] and print each number doubled.",
      "Inside the loop, print num * 2 for each element.",
      "# Put it all together\n",
      "2\n4\n6\n8\n10",
      "numbers = [1, 2, 3, 4, 5]\nfor num in numbers:\n    print(num * 2)",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_catalog_has_dense_ids() {
    let cat = Catalog::builtin();
    assert_eq!(cat.len(), 15);
    for (i, l) in cat.lessons().iter().enumerate() {
      assert_eq!(l.id, (i + 1) as u32);
    }
  }

  #[test]
  fn lookup_outside_range_is_not_found() {
    let cat = Catalog::builtin();
    assert!(cat.get(0).is_none());
    assert!(cat.get(16).is_none());
    assert_eq!(cat.get(1).map(|l| l.id), Some(1));
    assert_eq!(cat.get(15).map(|l| l.id), Some(15));
  }

  #[test]
  fn non_dense_bank_is_rejected() {
    let mut lessons = builtin_lessons();
    lessons[3].id = 9;
    assert!(Catalog::from_lessons(lessons).is_err());
    assert!(Catalog::from_lessons(vec![]).is_err());
  }
}
