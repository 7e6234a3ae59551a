//! Integration Tests for the Conversion Facade
//!
//! Exercises cache accounting and shape dispatch through [`Converter`], with
//! the built-in engine and with an engine that counts its calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use formula_cache::{
    BackwardOptions, CacheStats, ConvertError, Converter, Direction, EngineAdapter,
    ForwardOptions, FormulaOutput, Result,
};
use serde_json::json;

// == Helper Functions ==

/// Echo engine that counts every entry point it serves.
#[derive(Default)]
struct CountingEngine {
    scalar_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl CountingEngine {
    fn scalar_calls(&self) -> usize {
        self.scalar_calls.load(Ordering::SeqCst)
    }

    fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl EngineAdapter for CountingEngine {
    fn tex_to_typst(&self, text: &str, _options: &ForwardOptions) -> Result<String> {
        self.scalar_calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("bad") {
            return Err(ConvertError::conversion("rejected"));
        }
        Ok(format!("typst:{}", text))
    }

    fn typst_to_tex(&self, text: &str, _options: &BackwardOptions) -> Result<String> {
        self.scalar_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("tex:{}", text))
    }

    fn tex_to_typst_batch(
        &self,
        texts: &[String],
        _options: &ForwardOptions,
    ) -> Result<Vec<String>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        texts
            .iter()
            .map(|text| {
                if text.contains("bad") {
                    Err(ConvertError::conversion("rejected"))
                } else {
                    Ok(format!("typst:{}", text))
                }
            })
            .collect()
    }
}

fn counting_converter() -> (Arc<CountingEngine>, Converter) {
    let engine = Arc::new(CountingEngine::default());
    let converter = Converter::new(engine.clone(), 16);
    (engine, converter)
}

fn forward_stats(converter: &Converter) -> CacheStats {
    converter.cache_stats()[&Direction::Forward]
}

fn macros(pairs: &[(&str, &str)]) -> ForwardOptions {
    pairs
        .iter()
        .fold(ForwardOptions::new(), |opts, (k, v)| opts.custom_macro(*k, *v))
}

// == Cache Accounting ==

#[test]
fn test_repeat_call_is_a_hit() {
    let converter = Converter::with_capacity(16);
    let opts = ForwardOptions::default();

    let first = converter.convert_forward(r"\frac{1}{2}", &opts).unwrap();
    assert_eq!(first, FormulaOutput::Scalar("1/2".into()));
    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses), (0, 1));

    let second = converter.convert_forward(r"\frac{1}{2}", &opts).unwrap();
    assert_eq!(second, first);
    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[test]
fn test_hit_skips_engine() {
    let (engine, converter) = counting_converter();
    let opts = ForwardOptions::default();

    converter.convert_forward("x", &opts).unwrap();
    converter.convert_forward("x", &opts).unwrap();
    converter.convert_forward("x", &opts).unwrap();

    assert_eq!(engine.scalar_calls(), 1);
    assert_eq!(forward_stats(&converter).hits, 2);
}

#[test]
fn test_clear_cache_resets_and_next_call_misses() {
    let converter = Converter::with_capacity(16);
    let opts = ForwardOptions::default();
    converter.convert_forward(r"\alpha", &opts).unwrap();
    converter.convert_forward(r"\alpha", &opts).unwrap();
    converter
        .convert_backward("alpha", &BackwardOptions::default())
        .unwrap();

    converter.clear_cache();

    for stats in converter.cache_stats().values() {
        assert_eq!((stats.hits, stats.misses, stats.size), (0, 0, 0));
    }

    converter.convert_forward(r"\alpha", &opts).unwrap();
    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses), (0, 1));
}

#[test]
fn test_macro_order_shares_a_key() {
    let (engine, converter) = counting_converter();

    let ab = macros(&[("a", "1"), ("b", "2")]);
    let ba = macros(&[("b", "2"), ("a", "1")]);

    converter.convert_forward(r"\a + \b", &ab).unwrap();
    converter.convert_forward(r"\a + \b", &ba).unwrap();

    assert_eq!(engine.scalar_calls(), 1);
    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
}

#[test]
fn test_option_change_is_a_distinct_key() {
    let converter = Converter::with_capacity(16);

    let slash = converter
        .convert_forward(r"\frac{1}{2}", &ForwardOptions::default())
        .unwrap();
    let frac = converter
        .convert_forward(r"\frac{1}{2}", &ForwardOptions::new().frac_to_slash(false))
        .unwrap();

    assert_eq!(slash, FormulaOutput::Scalar("1/2".into()));
    assert_eq!(frac, FormulaOutput::Scalar("frac(1, 2)".into()));

    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 2, 2));
}

#[test]
fn test_explicit_default_differs_from_absent() {
    let (engine, converter) = counting_converter();

    converter
        .convert_forward("x", &ForwardOptions::default())
        .unwrap();
    converter
        .convert_forward("x", &ForwardOptions::new().frac_to_slash(true))
        .unwrap();

    assert_eq!(engine.scalar_calls(), 2);
}

// == Batch Dispatch ==

#[test]
fn test_batch_leaves_stats_unchanged() {
    let (engine, converter) = counting_converter();
    let opts = ForwardOptions::default();
    converter.convert_forward("a", &opts).unwrap();
    converter.convert_forward("a", &opts).unwrap();
    let before = forward_stats(&converter);

    let out = converter
        .convert_forward(vec!["a", "b", "c"], &opts)
        .unwrap();

    assert_eq!(out.into_batch().unwrap().len(), 3);
    assert_eq!(forward_stats(&converter), before);
    assert_eq!(engine.batch_calls(), 1);
    assert_eq!(engine.scalar_calls(), 1);
}

#[test]
fn test_batch_matches_scalar_calls() {
    let converter = Converter::with_capacity(16);
    let opts = ForwardOptions::default();
    let formulas = [r"\alpha + \beta", r"\sqrt{x}", r"\frac{a+b}{2}"];

    let batch = converter
        .convert_forward(&formulas[..], &opts)
        .unwrap()
        .into_batch()
        .unwrap();

    let scalars: Vec<String> = formulas
        .iter()
        .map(|f| {
            converter
                .convert_forward(*f, &opts)
                .unwrap()
                .into_scalar()
                .unwrap()
        })
        .collect();

    assert_eq!(batch, scalars);
}

#[test]
fn test_empty_batch() {
    let (engine, converter) = counting_converter();
    let before = converter.cache_stats();

    let out = converter
        .convert_forward(Vec::<String>::new(), &ForwardOptions::default())
        .unwrap();

    assert_eq!(out, FormulaOutput::Batch(vec![]));
    assert_eq!(converter.cache_stats(), before);
    assert_eq!(engine.batch_calls(), 0);
}

#[test]
fn test_batch_failure_is_all_or_nothing() {
    let converter = Converter::with_capacity(16);

    let err = converter
        .convert_forward(vec![r"\alpha", r"\frac{1"], &ForwardOptions::default())
        .unwrap_err();

    assert!(matches!(err, ConvertError::Conversion(_)));
    assert!(err.to_string().contains(r"(in '\frac{1')"));
    assert_eq!(forward_stats(&converter).size, 0);
}

// == Errors ==

#[test]
fn test_wrong_input_types() {
    let (engine, converter) = counting_converter();

    let err = converter
        .convert_forward(json!(123), &ForwardOptions::default())
        .unwrap_err();
    assert_eq!(err, ConvertError::type_mismatch("int"));

    let err = converter
        .convert_backward(json!({"k": 1}), &BackwardOptions::default())
        .unwrap_err();
    assert_eq!(err, ConvertError::type_mismatch("dict"));

    assert_eq!(engine.scalar_calls() + engine.batch_calls(), 0);
    for stats in converter.cache_stats().values() {
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }
}

#[test]
fn test_errors_are_not_cached() {
    let (engine, converter) = counting_converter();
    let opts = ForwardOptions::default();

    assert!(converter.convert_forward("bad", &opts).is_err());
    assert!(converter.convert_forward("bad", &opts).is_err());

    assert_eq!(engine.scalar_calls(), 2);
    let stats = forward_stats(&converter);
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 2, 0));
}

// == Eviction ==

#[test]
fn test_capacity_bounds_size() {
    let engine = Arc::new(CountingEngine::default());
    let converter = Converter::new(engine.clone(), 2);
    let opts = BackwardOptions::default();

    converter.convert_backward("a", &opts).unwrap();
    converter.convert_backward("b", &opts).unwrap();
    converter.convert_backward("a", &opts).unwrap(); // a is now most recent
    converter.convert_backward("c", &opts).unwrap(); // evicts b

    let stats = converter.cache_stats()[&Direction::Backward];
    assert_eq!((stats.size, stats.capacity, stats.evictions), (2, 2, 1));

    converter.convert_backward("a", &opts).unwrap();
    converter.convert_backward("b", &opts).unwrap();
    assert_eq!(engine.scalar_calls(), 4);
}

// == Concurrency ==

#[test]
fn test_shared_across_threads() {
    let converter = Arc::new(Converter::with_capacity(64));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let converter = Arc::clone(&converter);
            std::thread::spawn(move || {
                let text = format!("x_{}", i % 4);
                for _ in 0..10 {
                    converter
                        .convert_forward(text.as_str(), &ForwardOptions::default())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = forward_stats(&converter);
    assert_eq!(stats.hits + stats.misses, 80);
    assert_eq!(stats.size, 4);
}

// == Hostile Input ==

#[test]
fn test_deep_nesting_is_a_conversion_error() {
    let converter = Converter::with_capacity(16);
    let n = 10_000;

    let tex = format!("{}x{}", "{".repeat(n), "}".repeat(n));
    let err = converter
        .convert_forward(tex, &ForwardOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::Conversion(_)));

    let typst = format!("{}x{}", "(".repeat(n), ")".repeat(n));
    let err = converter
        .convert_backward(typst, &BackwardOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::Conversion(_)));

    for stats in converter.cache_stats().values() {
        assert_eq!(stats.size, 0);
    }
}

#[test]
fn test_exponential_macros_are_rejected() {
    let converter = Converter::with_capacity(16);
    let names: Vec<String> = (0..26).map(|i| format!("m{}", (b'a' + i) as char)).collect();
    let mut opts = ForwardOptions::new().custom_macro(format!("\\{}", names[25]), "x");
    for pair in names.windows(2) {
        opts = opts.custom_macro(format!("\\{}", pair[0]), format!("\\{} \\{}", pair[1], pair[1]));
    }

    let err = converter.convert_forward(r"\ma", &opts).unwrap_err();
    assert!(matches!(err, ConvertError::Conversion(_)));
}
