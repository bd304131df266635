// src/constants.rs

// --- Importer Paths ---
pub const SNAPSHOT_PATH: &str = "processed-data/final_database.json";
pub const DB_PATH_ENV: &str = "LEETBUDDY_DB";
pub const DB_PATH_DEFAULT: &str = "data/leetbuddy.db";

// --- Metadata Keys ---
pub const META_TOTAL_PROBLEMS: &str = "total_problems";
pub const META_TOTAL_SOLUTIONS: &str = "total_solutions";
pub const META_LAST_SYNC: &str = "last_sync";

// --- Solution Provenance ---
pub const SOURCE_DEFAULT: &str = "community";

// --- Roadmap Categories ---
pub const CATEGORY_CURATED: &str = "curated";
pub const CATEGORY_TOPIC: &str = "topic";

/// Prefix distinguishing synthesized topic roadmaps from curated ones.
pub const TOPIC_ROADMAP_PREFIX: &str = "topic_";

/// Curated sheets read from the `roadmaps` field of a snapshot record:
/// (name, display_name, description).
pub const CURATED_SHEETS: &[(&str, &str, &str)] = &[
    (
        "grind_250",
        "Grind 250",
        "The Grind 250 interview sheet, ordered by topic progression",
    ),
    (
        "leetcode_280",
        "LeetCode 280",
        "280 hand-picked questions covering every major pattern",
    ),
    (
        "blind_75",
        "Blind 75",
        "The classic Blind 75 list of must-know problems",
    ),
];

/// Curators whose solution provenance tag enrolls the parent problem in a
/// roadmap of their own: (source tag, name, display_name, description).
pub const CURATOR_ROADMAPS: &[(&str, &str, &str, &str)] = &[
    (
        "NeetCode",
        "neetcode",
        "NeetCode",
        "Problems with a NeetCode walkthrough solution",
    ),
    (
        "Striver",
        "striver",
        "Striver",
        "Problems covered in Striver's playlists",
    ),
];

/// Topic learning order (Striver's A2Z progression). Topic roadmaps are
/// emitted in this order; topics missing from it are appended afterwards.
pub const LEARNING_ORDER: &[&str] = &[
    // Fundamentals
    "Array",
    "String",
    "Math",
    // Basic techniques
    "Hash Table",
    "Sorting",
    "Two Pointers",
    "Sliding Window",
    "Prefix Sum",
    "Binary Search",
    "Bit Manipulation",
    "Counting",
    // Recursion & Patterns
    "Recursion",
    "Backtracking",
    "Divide and Conquer",
    "Greedy",
    // Data Structures - Linear
    "Stack",
    "Queue",
    "Monotonic Stack",
    "Monotonic Queue",
    "Linked List",
    "Doubly-Linked List",
    // Data Structures - Trees
    "Tree",
    "Binary Tree",
    "Binary Search Tree",
    "Heap (Priority Queue)",
    "Trie",
    "Segment Tree",
    "Binary Indexed Tree",
    "Ordered Set",
    // Graph Theory
    "Graph",
    "Depth-First Search",
    "Breadth-First Search",
    "Topological Sort",
    "Shortest Path",
    "Union Find",
    "Minimum Spanning Tree",
    "Strongly Connected Component",
    "Biconnected Component",
    "Eulerian Circuit",
    // Dynamic Programming
    "Dynamic Programming",
    "Memoization",
    "Bitmask",
    // Matrix & Geometry
    "Matrix",
    "Geometry",
    "Line Sweep",
    // Advanced
    "Simulation",
    "Enumeration",
    "Combinatorics",
    "Number Theory",
    "Game Theory",
    "Brainteaser",
    // String Advanced
    "String Matching",
    "Rolling Hash",
    "Hash Function",
    "Suffix Array",
    // Sorting Advanced
    "Merge Sort",
    "Quickselect",
    "Counting Sort",
    "Bucket Sort",
    "Radix Sort",
    // Special Topics
    "Design",
    "Data Stream",
    "Iterator",
    "Randomized",
    "Reservoir Sampling",
    "Rejection Sampling",
    "Probability and Statistics",
    "Concurrency",
    "Database",
    "Shell",
    "Interactive",
];
