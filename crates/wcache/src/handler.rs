//! Command handler for the wcache shell

use std::fmt;
use std::sync::Arc;
use weightcache::WeightedCache;

/// Reply to a single command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command succeeded with nothing to report
    Ok,
    /// Answer to PING
    Pong,
    /// Answer to QUIT; the shell stops reading after this
    Bye,
    /// A stored value
    Value(String),
    /// Key not resident
    Nil,
    /// Numeric answer
    Integer(i64),
    /// Free-form answer
    Text(String),
    /// Command failed
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Pong => f.write_str("PONG"),
            Reply::Bye => f.write_str("BYE"),
            Reply::Value(v) | Reply::Text(v) => f.write_str(v),
            Reply::Nil => f.write_str("(nil)"),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Error(msg) => write!(f, "ERR {}", msg),
        }
    }
}

fn wrong_args(command: &str) -> Reply {
    Reply::Error(format!(
        "wrong number of arguments for '{}' command",
        command.to_lowercase()
    ))
}

pub struct CommandHandler {
    cache: Arc<WeightedCache<String>>,
}

impl CommandHandler {
    pub fn new(cache: Arc<WeightedCache<String>>) -> Self {
        Self { cache }
    }

    /// Run one command line. Returns `None` for blank lines.
    pub fn handle(&self, line: &str) -> Option<Reply> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_uppercase();
        let args: Vec<&str> = parts.collect();

        let reply = match command.as_str() {
            "PING" => self.handle_ping(&args),
            "QUIT" => Reply::Bye,
            "SET" => self.handle_set(&args),
            "GET" => self.handle_get(&args),
            "EXISTS" => self.handle_exists(&args),
            "CLEAR" => self.handle_clear(&args),
            "WEIGHT" => self.handle_weight(&args),
            "BUDGET" => self.handle_budget(&args),
            "LEN" => self.handle_len(&args),
            "KEYS" => self.handle_keys(&args),
            "STATS" => self.handle_stats(&args),
            "VERBOSE" => self.handle_verbose(&args),
            _ => Reply::Error(format!("unknown command '{}'", command)),
        };
        Some(reply)
    }

    fn handle_ping(&self, args: &[&str]) -> Reply {
        match args {
            [] => Reply::Pong,
            _ => Reply::Text(args.join(" ")),
        }
    }

    fn handle_set(&self, args: &[&str]) -> Reply {
        if args.len() < 3 {
            return wrong_args("SET");
        }

        let weight: u64 = match args[1].parse() {
            Ok(w) => w,
            Err(_) => return Reply::Error(format!("invalid weight '{}'", args[1])),
        };

        match self.cache.insert(args[0], args[2..].join(" "), weight) {
            Ok(()) => Reply::Ok,
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn handle_get(&self, args: &[&str]) -> Reply {
        match args {
            [key] => self.cache.retrieve(key).map_or(Reply::Nil, Reply::Value),
            _ => wrong_args("GET"),
        }
    }

    fn handle_exists(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return wrong_args("EXISTS");
        }
        let count = args.iter().filter(|k| self.cache.contains_key(k)).count();
        Reply::Integer(count as i64)
    }

    fn handle_clear(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("CLEAR");
        }
        self.cache.clear();
        Reply::Ok
    }

    fn handle_weight(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("WEIGHT");
        }
        Reply::Integer(i64::try_from(self.cache.weight()).unwrap_or(i64::MAX))
    }

    fn handle_budget(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("BUDGET");
        }
        Reply::Integer(self.cache.budget())
    }

    fn handle_len(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("LEN");
        }
        Reply::Integer(self.cache.len() as i64)
    }

    fn handle_keys(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("KEYS");
        }
        let keys = self.cache.keys();
        if keys.is_empty() {
            Reply::Text("(empty)".to_string())
        } else {
            Reply::Text(keys.join(" "))
        }
    }

    fn handle_stats(&self, args: &[&str]) -> Reply {
        if !args.is_empty() {
            return wrong_args("STATS");
        }
        let stats = self.cache.stats();
        Reply::Text(format!(
            "hits={} misses={} inserts={} rejected={} evictions={} hit_ratio={:.2}",
            stats.hits(),
            stats.misses(),
            stats.inserts(),
            stats.rejected(),
            stats.evictions(),
            stats.hit_ratio(),
        ))
    }

    fn handle_verbose(&self, args: &[&str]) -> Reply {
        let verbose = match args {
            [flag] if flag.eq_ignore_ascii_case("on") => true,
            [flag] if flag.eq_ignore_ascii_case("off") => false,
            [flag] => return Reply::Error(format!("expected on or off, got '{}'", flag)),
            _ => return wrong_args("VERBOSE"),
        };
        self.cache.set_verbose(verbose);
        Reply::Ok
    }
}
