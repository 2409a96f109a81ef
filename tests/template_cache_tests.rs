// =============================================================================
// Template Cache Tests
// =============================================================================
// At-most-once compilation under concurrent access, failure retry, statistics

use artifact_gen::{
    CompiledTemplate, GenerationError, TemplateCache, TemplateEngine, TeraEngine, VariableContext,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// =============================================================================
// Helper Functions
// =============================================================================

fn greeting(name: &str) -> Result<Arc<dyn CompiledTemplate>, GenerationError> {
    TeraEngine::new().parse(name, "Hello, {{name}}!")
}

fn render(template: &Arc<dyn CompiledTemplate>, name: &str) -> String {
    template
        .render(&VariableContext::new().with("name", name))
        .expect("render")
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_first_access_compiles_once() {
    const THREADS: usize = 16;

    let cache = TemplateCache::new();
    let compile_calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let templates: Vec<Arc<dyn CompiledTemplate>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_compile("greeting.tmpl", |name| {
                            compile_calls.fetch_add(1, Ordering::SeqCst);
                            // Widen the race window.
                            thread::sleep(Duration::from_millis(50));
                            greeting(name)
                        })
                        .expect("compile")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect()
    });

    assert_eq!(compile_calls.load(Ordering::SeqCst), 1);
    let first = &templates[0];
    for template in &templates {
        assert!(Arc::ptr_eq(first, template), "all callers see one object");
    }

    let stats = cache.stats();
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, (THREADS - 1) as u64);
    assert_eq!(stats.entries, 1);
}

#[test]
fn different_names_compile_independently() {
    let cache = TemplateCache::new();
    let compile_calls = AtomicUsize::new(0);

    thread::scope(|scope| {
        for idx in 0..8 {
            let cache = &cache;
            let compile_calls = &compile_calls;
            scope.spawn(move || {
                let name = format!("template-{}.tmpl", idx % 4);
                cache
                    .get_or_compile(&name, |name| {
                        compile_calls.fetch_add(1, Ordering::SeqCst);
                        greeting(name)
                    })
                    .expect("compile");
            });
        }
    });

    assert_eq!(compile_calls.load(Ordering::SeqCst), 4);
    assert_eq!(cache.len(), 4);
}

#[test]
fn concurrent_renders_share_one_template() {
    let cache = TemplateCache::new();
    let template = cache.get_or_compile("greeting.tmpl", greeting).expect("compile");

    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = ["Ada", "Grace", "Linus", "Barbara"]
            .into_iter()
            .map(|name| {
                let template = Arc::clone(&template);
                scope.spawn(move || render(&template, name))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(
        outputs,
        vec!["Hello, Ada!", "Hello, Grace!", "Hello, Linus!", "Hello, Barbara!"]
    );
}

// =============================================================================
// Failure Handling
// =============================================================================

#[test]
fn failed_compilation_is_retried() {
    let cache = TemplateCache::new();
    let attempts = AtomicUsize::new(0);

    let compile = |name: &str| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            Err(GenerationError::ResourceNotFound {
                template: name.to_string(),
            })
        } else {
            greeting(name)
        }
    };

    let first = cache.get_or_compile("greeting.tmpl", compile);
    assert!(first.is_err());
    assert!(!cache.contains("greeting.tmpl"));

    let second = cache
        .get_or_compile("greeting.tmpl", compile)
        .expect("second attempt succeeds");
    assert_eq!(render(&second, "World"), "Hello, World!");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    // Success is now cached.
    cache.get_or_compile("greeting.tmpl", compile).expect("cached");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    let stats = cache.stats();
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn empty_cache_stats() {
    let cache = TemplateCache::new();
    let stats = cache.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.hit_rate(), 0.0);
    assert!(cache.is_empty());
}
